/// `config_struct!` declares a config section and its defaults in one place
///
/// Each field is written as `name: Type = default`. The macro generates the
/// struct with public fields, a `Default` impl built from the listed values,
/// and serde support with `#[serde(default)]` so a partial TOML table only
/// overrides the keys it names.
///
/// ```ignore
/// config_struct! {
///     pub struct TrackingConfig {
///         alert_threshold: f64 = 0.05,
///         poll_interval_secs: u64 = 30,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
