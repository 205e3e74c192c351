pub mod config {
    use serde::Deserialize;
    use std::path::PathBuf;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_port")]
        pub port: u16,
        /// Directory served under `/static`.
        #[serde(default = "default_static_dir")]
        pub static_dir: PathBuf,
    }

    impl Config {
        /// Loads configuration from environment variables (`PORT`, `STATIC_DIR`).
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_builder(
                config::Config::builder().add_source(config::Environment::default()),
            )
        }

        fn from_builder(
            builder: config::ConfigBuilder<config::builder::DefaultState>,
        ) -> anyhow::Result<Self> {
            let settings = builder.build()?;
            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_static_dir() -> PathBuf {
        PathBuf::from("static")
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn can_fall_back_to_defaults() {
            let config = Config::from_builder(config::Config::builder()).unwrap();

            assert_eq!(config.port, 8080);
            assert_eq!(config.static_dir, PathBuf::from("static"));
        }

        #[test]
        fn can_override_port_and_static_dir() {
            let builder = config::Config::builder()
                .set_override("port", 3000)
                .unwrap()
                .set_override("static_dir", "/srv/assets")
                .unwrap();

            let config = Config::from_builder(builder).unwrap();

            assert_eq!(config.port, 3000);
            assert_eq!(config.static_dir, PathBuf::from("/srv/assets"));
        }

        #[test]
        fn rejects_port_out_of_range() {
            let builder = config::Config::builder()
                .set_override("port", 70000)
                .unwrap();

            assert!(Config::from_builder(builder).is_err());
        }
    }
}

pub mod todo;
pub mod web;
