use clap::Parser;
use git_copy::{git_copy_main, GitCopyCli};
use std::process::exit;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = GitCopyCli::parse();
    println!(concat!(
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    ));
    env_logger::builder()
        .filter_level(args.log_level())
        .format_target(false)
        .format_timestamp(None)
        .init();
    match git_copy_main(args).await {
        Ok(_) => {
            exit(0);
        }
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };
}
