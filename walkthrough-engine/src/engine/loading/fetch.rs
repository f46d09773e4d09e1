use super::asset_loader::LoadError;

/// Largest scene body accepted from a remote host.
#[cfg(not(target_arch = "wasm32"))]
const MAX_SCENE_BYTES: u64 = 512 * 1024 * 1024;

/// Fetch the raw scene bytes behind `url`.
///
/// Native builds fetch `http(s)://` URLs with `ureq` and read anything else
/// from the local filesystem.
#[cfg(not(target_arch = "wasm32"))]
pub async fn fetch_asset(url: String) -> Result<Vec<u8>, LoadError> {
    if is_remote(&url) {
        let mut response = ureq::get(&url)
            .call()
            .map_err(|err| LoadError::Fetch(format!("{url}: {err}")))?;
        response
            .body_mut()
            .with_config()
            .limit(MAX_SCENE_BYTES)
            .read_to_vec()
            .map_err(|err| LoadError::Fetch(format!("{url}: {err}")))
    } else {
        std::fs::read(&url).map_err(|err| LoadError::Fetch(format!("{url}: {err}")))
    }
}

/// Fetch the raw scene bytes behind `url` through the browser's `fetch`.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_asset(url: String) -> Result<Vec<u8>, LoadError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let js_error = |err: wasm_bindgen::JsValue| LoadError::Fetch(format!("{url}: {err:?}"));

    let window = web_sys::window().ok_or_else(|| LoadError::Fetch("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_str(&url))
        .await
        .map_err(js_error)?;
    let response: web_sys::Response = response.dyn_into().map_err(js_error)?;
    if !response.ok() {
        return Err(LoadError::Fetch(format!("{url}: HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

pub fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
