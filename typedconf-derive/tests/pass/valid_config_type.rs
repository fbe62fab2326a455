// A well-formed trait keeps compiling once the macro has run
use std::time::Duration;

use typedconf::{config_type, NoMapper, NonEmptyString};

#[config_type(context_path = "server")]
pub trait ServerConfig {
    #[config_value(path = "host", validated_by(NonEmptyString))]
    fn host(&self) -> String;

    #[config_value(path = "timeout", mapper = NoMapper)]
    fn timeout(&self) -> Duration;

    fn address(&self) -> String {
        format!("{}:80", self.host())
    }
}

struct Fixed;

impl ServerConfig for Fixed {
    fn host(&self) -> String {
        "localhost".to_string()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }
}

fn main() {
    assert_eq!(Fixed.address(), "localhost:80");
}
