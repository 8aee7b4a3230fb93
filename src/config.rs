#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum)]
    pub cargo_env: CargoEnv,

    // port that the app will bind to
    #[clap(long, env, default_value = "5000")]
    pub port: u16,

    // hard cap for uploaded playlist files, enforced before parsing starts.
    // 50 covers every playlist I've seen in the wild, bump it if providers
    // get even more bloated
    #[clap(long, env, default_value = "50")]
    pub max_upload_mb: usize,

    // this should be either * for allowing everything, or a comma seperated list of domains like
    // example.com,something.com
    #[clap(long, env)]
    pub cors_origin: String,

    // same as above but used for preview environments to stress or test the api.
    #[clap(long, env)]
    pub preview_cors_origin: String,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,
}

impl Default for AppConfig {
    // defaults aren't really needed here but it's here as a bad fallback
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            port: 5000,
            max_upload_mb: 50,
            cors_origin: "*".to_string(),
            preview_cors_origin: "*".to_string(),
            sentry_dsn: None,
        }
    }
}
