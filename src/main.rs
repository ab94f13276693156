use toolroom::{AppConfig, run};

fn main() {
    env_logger::init();

    run(AppConfig::new().title("Toolroom").size(1280, 720));
}
