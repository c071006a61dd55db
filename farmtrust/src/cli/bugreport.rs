use bugreport::{
    bugreport,
    collector::{CompileTimeInformation, EnvironmentVariables, OperatingSystem, SoftwareVersion},
    format::Markdown,
};

pub fn run() {
    bugreport!()
        .info(SoftwareVersion::default())
        .info(OperatingSystem::default())
        .info(EnvironmentVariables::list(&[
            "PORT",
            "FARMTRUST_BIND",
            "FARMTRUST_UPLOAD_DIR",
            "FARMTRUST_MAX_FILES",
            "FARMTRUST_MAX_FILE_SIZE",
            "FARMTRUST_REQUEST_TIMEOUT_SECS",
            "RUST_LOG",
        ]))
        .info(CompileTimeInformation::default())
        .print::<Markdown>();
}
