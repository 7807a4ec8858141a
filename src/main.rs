use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() -> eframe::Result {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    gpuviz::run()
}
