// config_type traits have to be public
#![allow(dead_code)]

use typedconf::config_type;

#[config_type]
trait Hidden {}

fn main() {}
