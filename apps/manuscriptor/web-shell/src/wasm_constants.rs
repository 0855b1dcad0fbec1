pub(crate) const RELOAD_STATS_ID: &str = "reload_stats";
pub(crate) const TOGGLE_FONT_FAMILY: &str = "courier, fixed-width";
pub(crate) const ID_SEED_SCALE: f64 = 4_294_967_296.0;
