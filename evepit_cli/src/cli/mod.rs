mod common;
mod report;
mod root;
mod whoami;

pub(crate) use root::get_args;
