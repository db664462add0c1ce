//! Display core for an indoor-positioning rig.
//!
//! Host-independent pieces of the radar view: the fixed [`layout`], the mutable
//! [`store`], the inbound [`protocol`], pulse bookkeeping, the frame loop and
//! the reconnecting socket state machine. The browser shell lives in the
//! `radarview_web` crate and supplies the [`render::Painter`],
//! [`animation::FrameHost`], [`connection::Transport`] and
//! [`connection::ReconnectTimer`] implementations.
//!
//! ```
//! use radarview::config::RadarConfig;
//! use radarview::protocol::parse_frame;
//! use radarview::store::DisplayStore;
//!
//! let cfg = RadarConfig::default();
//! let mut store = DisplayStore::from_config(&cfg);
//! let msg = parse_frame(r#"{"source": {"x": 320, "y": 240}, "active_beacon": 1}"#).unwrap();
//! store.apply_update(&msg);
//! assert!(store.source().valid);
//! assert_eq!(store.active_beacon(), Some(1));
//! ```

#[path = "core/animation.rs"]
pub mod animation;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/connection.rs"]
pub mod connection;

#[path = "core/demo.rs"]
pub mod demo;

#[path = "core/layout.rs"]
pub mod layout;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/protocol.rs"]
pub mod protocol;

#[path = "core/pulse.rs"]
pub mod pulse;

#[path = "core/render.rs"]
pub mod render;

#[path = "core/store.rs"]
pub mod store;

#[path = "core/time.rs"]
pub mod time;
