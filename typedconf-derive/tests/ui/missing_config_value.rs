// Abstract methods need config_value or a default body
#![allow(dead_code)]

use typedconf::config_type;

#[config_type(context_path = "server")]
pub trait ServerConfig {
    #[config_value(path = "port")]
    fn port(&self) -> i32;

    fn host(&self) -> String;
}

fn main() {}
