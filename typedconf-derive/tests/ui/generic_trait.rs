// config_type traits cannot take generic parameters
#![allow(dead_code)]

use typedconf::config_type;

#[config_type]
pub trait Settings<T> {}

fn main() {}
