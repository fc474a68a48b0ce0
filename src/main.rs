use std::{env, fs::File, process};

use cafe_class_file::{
    AttributeBody, ClassFile, ParseOptions, TextDecoding, DEFAULT_MAX_ATTRIBUTE_DEPTH,
};
use memmap::Mmap;

fn main() {
    pretty_env_logger::init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: cafe <path/to/Class.class>");
        process::exit(2);
    };

    let file = File::open(&path).unwrap_or_else(|e| {
        log::error!("Cannot open {}: {}", path, e);
        process::exit(1);
    });
    let mmap = unsafe { Mmap::map(&file) }.unwrap_or_else(|e| {
        log::error!("Cannot map {}: {}", path, e);
        process::exit(1);
    });

    let class_file = match ClassFile::parse_with(&mmap, options_from_env()) {
        Ok(class_file) => class_file,
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path, e);
            process::exit(1);
        }
    };

    print_summary(&class_file);
    println!();
    println!("{:#?}", class_file);
}

fn options_from_env() -> ParseOptions {
    let max_attribute_depth = env::var("CAFE_MAX_ATTRIBUTE_DEPTH")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_ATTRIBUTE_DEPTH);
    let text_decoding = if env::var_os("CAFE_UTF8").is_some() {
        TextDecoding::Utf8Lossy
    } else {
        TextDecoding::Latin1
    };

    ParseOptions {
        max_attribute_depth,
        text_decoding,
        ..ParseOptions::default()
    }
}

fn print_summary(class_file: &ClassFile) {
    let or_invalid = |r: cafe_class_file::Result<&str>| r.unwrap_or("<invalid>").to_owned();

    println!("Class:      {}", or_invalid(class_file.class_name()));
    println!("Version:    {}", class_file.version);
    println!("Flags:      {:?}", class_file.access_flags);
    match class_file.super_class() {
        Ok(Some(name)) => println!("Super:      {}", name),
        Ok(None) => println!("Super:      <none>"),
        Err(_) => println!("Super:      <invalid>"),
    }
    for interface in &class_file.interfaces {
        println!("Implements: {}", interface.name);
    }

    println!();
    println!("Fields:");
    for field in &class_file.fields {
        println!(
            "    {} {}",
            or_invalid(class_file.field_name(field)),
            or_invalid(class_file.field_descriptor(field))
        );
    }

    println!("Methods:");
    for method in &class_file.methods {
        print!(
            "    {}{}",
            or_invalid(class_file.method_name(method)),
            or_invalid(class_file.method_descriptor(method))
        );
        match method.code() {
            Some(code) => println!(
                " (stack={}, locals={}, {} bytes of code, {} handlers)",
                code.max_stack,
                code.max_locals,
                code.code_length(),
                code.exception_table.len()
            ),
            None => println!(),
        }
    }

    for attribute in &class_file.attributes {
        if let AttributeBody::SourceFile { sourcefile_index } = attribute.body {
            println!();
            println!(
                "Source:     {}",
                or_invalid(class_file.constant_pool.utf8(sourcefile_index))
            );
        }
    }
}
