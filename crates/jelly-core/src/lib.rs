#![deny(warnings)]
pub mod belief;
pub mod game;
pub mod math;
pub mod model;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "russian-jelly"
    }

    pub const fn codename() -> &'static str {
        "Bullet Jelly"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "russian-jelly");
        assert_eq!(AppInfo::codename(), "Bullet Jelly");
        assert!(!AppInfo::version().is_empty());
    }
}
