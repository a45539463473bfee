mod common;
mod interviews;
mod users;
