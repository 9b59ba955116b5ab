use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct Api {
    pub(crate) port: u16,
    #[serde(default = "default_scheme")]
    pub(crate) scheme: String
}

fn default_scheme() -> String {
    "http".to_string()
}
