// config_value outside a config_type trait is an error
use typedconf::config_value;

#[config_value(path = "port")]
pub fn port() -> i32 {
    8080
}

fn main() {
    let _ = port();
}
