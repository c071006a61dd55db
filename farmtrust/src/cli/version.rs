use std::env;

pub fn run() {
    let rows = [
        ("Name", clap::crate_name!()),
        ("Version", clap::crate_version!()),
        ("OS", env::consts::OS),
        ("Architecture", env::consts::ARCH),
    ];
    for (key, value) in rows {
        println!("{key:<15}: {value}");
    }
}
