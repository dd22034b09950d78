extern crate itertools;
#[macro_use]
extern crate nom;
#[macro_use]
extern crate quick_error;
extern crate rayon;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

pub mod gc_log_parsing;
pub mod config;
pub mod snapshot;
pub mod classify;
pub mod histogram;
pub mod series;
pub mod gc_log_info;
pub mod export;
