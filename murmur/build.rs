static OUT_DIR: &str = "src/generated";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/chat.proto");
    println!("cargo:rerun-if-env-changed=MURMUR_REGENERATE_PROTO");

    // The generated code is checked in to `src/generated` so that IDEs can
    // infer the types and builds don't need `protoc`. Set
    // MURMUR_REGENERATE_PROTO after editing the proto to refresh it.
    //
    // Note: to use this file, you'll have to use `include!` instead of
    // `include_proto!`.
    if std::env::var_os("MURMUR_REGENERATE_PROTO").is_none() {
        return Ok(());
    }

    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .out_dir(OUT_DIR)
        .compile(&["proto/chat.proto"], &["proto"])?;
    Ok(())
}
