// config_type only applies to traits
#![allow(dead_code)]

use typedconf::config_type;

#[config_type]
pub struct Settings;

fn main() {}
