use radarview::protocol::DeviceStatus;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// GET the device's status endpoint and parse the reply.
pub(super) async fn fetch_status(url: &str) -> Result<DeviceStatus, String> {
    let window = web_sys::window().ok_or("status: no window".to_string())?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|_| format!("status: fetch {url} failed"))?
        .dyn_into::<web_sys::Response>()
        .map_err(|_| "status: expected Response".to_string())?;
    if !resp.ok() {
        return Err(format!("status: HTTP {}", resp.status()));
    }

    let body = resp
        .text()
        .map_err(|_| "status: body unreadable".to_string())?;
    let text = JsFuture::from(body)
        .await
        .map_err(|_| "status: body read failed".to_string())?
        .as_string()
        .ok_or("status: body is not text".to_string())?;
    DeviceStatus::parse(&text).map_err(|e| format!("status: {e}"))
}
