//! Runs the sample execution service locally.
//!
//! The default port matches the address the dashboard always talked to, so a
//! plain `relato compose` works against a plain `relato sandbox`.
use tokio::runtime::Builder;

pub fn run(port: u16) {
    // Single threaded is plenty for a service that gets called once per
    // composed report.
    let tokio = Builder::new_current_thread()
        .enable_io()
        .build()
        .expect("Cannot build tokio runtime");

    tokio.block_on(async {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .expect("Cannot start sandbox: network bind failed.");

        relato::sandbox::serve(listener)
            .await
            .expect("Cannot start sandbox: cannot run app");
    });
}
