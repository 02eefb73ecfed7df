mod app;
mod audio;
mod config;
mod error;
mod playlist;
mod resolve;
mod runtime;
mod store;
mod track;
mod ui;
mod util;

#[cfg(test)]
mod testing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
