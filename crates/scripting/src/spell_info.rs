/// Result of a native `GetSpellInfo` call. Fields missing or of the wrong
/// stack type come back as sentinels rather than failing the whole call,
/// since a partially-populated spell record is still useful to a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellInfo {
    pub name: String,
    pub rank: String,
    pub icon: String,
    pub cost: f64,
    pub power_type: i64,
    pub cast_time_ms: f64,
    pub min_range: f64,
    pub max_range: Option<f64>,
}

pub const SENTINEL_STRING: &str = "N/A";
pub const SENTINEL_NUMBER: f64 = -1.0;
pub const SENTINEL_INTEGER: i64 = -1;

impl SpellInfo {
    /// Every field at its sentinel value, used when the scripting state is
    /// unavailable and the call cannot be attempted at all.
    pub fn unavailable() -> Self {
        Self {
            name: SENTINEL_STRING.to_string(),
            rank: SENTINEL_STRING.to_string(),
            icon: SENTINEL_STRING.to_string(),
            cost: SENTINEL_NUMBER,
            power_type: SENTINEL_INTEGER,
            cast_time_ms: SENTINEL_NUMBER,
            min_range: SENTINEL_NUMBER,
            max_range: None,
        }
    }
}
