#![deny(warnings)]
pub mod game;
pub mod model;
pub mod rules;

pub struct EngineInfo;

impl EngineInfo {
    pub const fn name() -> &'static str {
        "septica-core"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
