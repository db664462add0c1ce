//! Settings taken from the hosting page: an inline JSON config element and the
//! query string (`?host=`, `?log=`, `?demo`).

use radarview::config::RadarConfig;
use tracing::Level;

const CONFIG_ELEMENT_ID: &str = "radar-config";

pub(super) struct PageConfig {
    pub(super) cfg: RadarConfig,
    /// Host the page was served from, empty for `file:` pages.
    pub(super) page_host: Option<String>,
    pub(super) secure: bool,
    pub(super) log_level: Level,
    pub(super) demo: bool,
    /// Why the inline config was ignored, if it was.
    pub(super) config_error: Option<String>,
}

impl PageConfig {
    pub(super) fn read() -> Self {
        let mut page = PageConfig {
            cfg: RadarConfig::default(),
            page_host: None,
            secure: false,
            log_level: Level::INFO,
            demo: false,
            config_error: None,
        };
        let Some(window) = web_sys::window() else {
            return page;
        };

        if let Some(text) = window
            .document()
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content())
        {
            match RadarConfig::from_json(&text) {
                Ok(cfg) => page.cfg = cfg,
                Err(e) => page.config_error = Some(format!("#{CONFIG_ELEMENT_ID}: {e}")),
            }
        }

        let location = window.location();
        page.page_host = location.host().ok().filter(|h| !h.is_empty());
        page.secure = location.protocol().is_ok_and(|p| p == "https:");

        let search = location.search().unwrap_or_default();
        if let Ok(params) = web_sys::UrlSearchParams::new_with_str(&search) {
            if let Some(host) = params.get("host").filter(|h| !h.trim().is_empty()) {
                page.cfg.socket.host = Some(host);
            }
            if let Some(level) = params.get("log").and_then(|l| l.parse::<Level>().ok()) {
                page.log_level = level;
            }
            page.demo = params.has("demo");
        }
        page
    }

    pub(super) fn socket_url(&self) -> String {
        self.cfg
            .socket
            .url(self.page_host.as_deref(), self.secure)
    }

    pub(super) fn status_url(&self) -> String {
        self.cfg
            .socket
            .status_url(self.page_host.as_deref(), self.secure)
    }
}
