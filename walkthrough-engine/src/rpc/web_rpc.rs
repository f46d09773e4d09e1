use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use super::protocol::{BridgeMessage, HostCommand, decode_command, encode};
use crate::engine::loading::scene_loader::SceneReady;
use crate::engine::viewer::ActiveViewer;

#[cfg(not(target_arch = "wasm32"))]
use super::host_router::HostRouter;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::assets::scene_setup::PropertySession;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// Outbound messages queued this frame, flushed in order by `send_outgoing_messages`.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing: Vec<BridgeMessage>,
}

impl WebRpcInterface {
    pub fn send(&mut self, message: BridgeMessage) {
        self.outgoing.push(message);
    }

    pub fn pending(&self) -> &[BridgeMessage] {
        &self.outgoing
    }
}

/// Raw inbound payloads, filled by the platform listener.
#[derive(Resource, Clone, Default)]
pub struct MessageQueue(Arc<Mutex<Vec<String>>>);

impl MessageQueue {
    pub fn push(&self, raw: String) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(raw);
        }
    }

    fn take(&self) -> Vec<String> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

/// Unparsed inbound payload.
#[derive(Event)]
struct IncomingBridgeMessage {
    content: String,
}

/// Host command that passed validation.
#[derive(Event, Debug, Clone)]
pub struct HostCommandEvent(pub HostCommand);

/// Systems of the bridge, split so the app can order intake before and flush after the viewer.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BridgeSet {
    Intake,
    Flush,
}

/// Plugin wiring the host bridge for the current target.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .init_resource::<MessageQueue>()
            .configure_sets(Update, BridgeSet::Intake.before(BridgeSet::Flush))
            .add_event::<IncomingBridgeMessage>()
            .add_event::<HostCommandEvent>()
            .add_systems(
                Update,
                (process_incoming_messages, parse_host_commands)
                    .chain()
                    .in_set(BridgeSet::Intake),
            )
            .add_systems(
                Update,
                (forward_viewer_events, send_outgoing_messages)
                    .chain()
                    .in_set(BridgeSet::Flush),
            );

        #[cfg(not(target_arch = "wasm32"))]
        app.init_resource::<HostRouter>();

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(queue: Res<MessageQueue>) {
    let queue = MessageQueue::clone(&queue);

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        match event.data().dyn_into::<js_sys::JsString>() {
            Ok(data) => queue.push(data.into()),
            Err(data) => warn!("Dropping non-string host message: {data:?}"),
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(err) =
                window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("Failed to register message listener: {err:?}");
            }
        }
        None => error!("Window object not available, host commands disabled"),
    }

    // Ownership moves to JS; the listener lives as long as the page.
    closure.forget();
}

fn process_incoming_messages(
    queue: Res<MessageQueue>,
    mut message_events: EventWriter<IncomingBridgeMessage>,
) {
    for content in queue.take() {
        message_events.write(IncomingBridgeMessage { content });
    }
}

fn parse_host_commands(
    mut events: EventReader<IncomingBridgeMessage>,
    mut commands: EventWriter<HostCommandEvent>,
) {
    for event in events.read() {
        match decode_command(&event.content) {
            Ok(command) => {
                debug!("Host command: {command:?}");
                commands.write(HostCommandEvent(command));
            }
            Err(err) => warn!("Dropping host payload: {err}"),
        }
    }
}

/// Queue viewer log/error events and scene lifecycle notifications.
fn forward_viewer_events(
    viewer: Option<ResMut<ActiveViewer>>,
    mut ready: EventReader<SceneReady>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    let Some(mut viewer) = viewer else {
        ready.clear();
        return;
    };
    for event in viewer.drain_events() {
        rpc.send(event.into());
    }
    for event in ready.read() {
        if event.generation == viewer.generation() {
            rpc.send(BridgeMessage::SceneReady {
                mode: viewer.mode(),
            });
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn send_outgoing_messages(mut rpc: ResMut<WebRpcInterface>) {
    for message in rpc.outgoing.drain(..) {
        send_message_to_host(&message);
    }
}

/// Native builds hand messages to the in-process router and loop its replies back.
#[cfg(not(target_arch = "wasm32"))]
fn send_outgoing_messages(
    mut rpc: ResMut<WebRpcInterface>,
    mut router: ResMut<HostRouter>,
    session: Res<PropertySession>,
    queue: Res<MessageQueue>,
) {
    for message in rpc.outgoing.drain(..) {
        for reply in router.route(&message, &session) {
            match encode(&reply) {
                Ok(raw) => queue.push(raw),
                Err(err) => error!("Failed to encode host reply: {err}"),
            }
        }
    }
}

/// Post to the React Native webview bridge when present, else to the parent window.
#[cfg(target_arch = "wasm32")]
fn send_message_to_host(message: &BridgeMessage) {
    let json = match encode(message) {
        Ok(json) => json,
        Err(err) => {
            error!("Failed to serialise message: {err}");
            return;
        }
    };
    let Some(window) = window() else {
        error!("Window object not available");
        return;
    };

    let webview = js_sys::Reflect::get(&window, &JsValue::from_str("ReactNativeWebView"))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null());
    if let Some(webview) = webview {
        let post = js_sys::Reflect::get(&webview, &JsValue::from_str("postMessage"))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok());
        if let Some(post) = post {
            if let Err(err) = post.call1(&webview, &JsValue::from_str(&json)) {
                error!("Failed to post to webview: {err:?}");
            }
            return;
        }
    }

    match window.parent().ok().flatten() {
        Some(parent) => {
            if let Err(err) = parent.post_message(&JsValue::from_str(&json), "*") {
                error!("Failed to send message to parent: {err:?}");
            }
        }
        None => warn!("No host window available for message transmission"),
    }
}
