fn main() {
    // Tell cargo to rerun this build script if the shader changes
    println!("cargo:rerun-if-changed=src/layers/renderer/shader.wgsl");

    // Validate the shader at compile time
    validate_shader("src/layers/renderer/shader.wgsl");
}

fn validate_shader(path: &str) {
    let shader_source = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read shader file {}: {}", path, e));

    // Parse the WGSL shader
    let module = match naga::front::wgsl::parse_str(&shader_source) {
        Ok(module) => module,
        Err(e) => {
            panic!("Shader parsing failed for {}:\n{}", path, e.emit_to_string(&shader_source));
        }
    };

    // Validate the parsed shader module
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );

    if let Err(e) = validator.validate(&module) {
        panic!("Shader validation failed for {}:\n{:?}", path, e);
    }
}
