mod cli;

use std::io;
use std::io::Read;
use std::process;

use clap::Parser;
use cli::Cli;
use tiny_http::Server;
use ufs::UfsFileSystem;
use ufs_fuse::{open_image, FsService, PREFIX};

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let device = open_image(&cli.image)?;
    let fs = UfsFileSystem::open(device).unwrap_or_else(|e| {
        eprintln!("{}: bad image: {e:?}", cli.image.display());
        process::exit(1);
    });
    let service = FsService::new(fs);

    let server = Server::http(("0.0.0.0", cli.port)).map_err(io::Error::other)?;
    log::info!(
        "serving {} under {PREFIX} on port {}",
        cli.image.display(),
        cli.port
    );

    for mut request in server.incoming_requests() {
        let mut body = Vec::new();
        if request.as_reader().read_to_end(&mut body).is_err() {
            let _ = request.respond(tiny_http::Response::empty(400));
            continue;
        }

        let method = request.method().to_string();
        let url = request.url().to_owned();
        let response = service.handle(&method, &url, &body);
        log::info!("{method} {url} -> {}", response.status);

        let _ = request.respond(
            tiny_http::Response::from_data(response.body).with_status_code(response.status),
        );
    }

    Ok(())
}
