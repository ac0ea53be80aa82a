use std::{env, fs};

use db::models::{
    project::{Project, ProjectStatus, PublicationState, UpsertProject},
    user::User,
};
use ts_rs::TS;
use utils::response::{ErrorCode, ErrorResponse};

fn generate_types_content() -> String {
    let decls = [
        User::decl(),
        ProjectStatus::decl(),
        PublicationState::decl(),
        Project::decl(),
        UpsertProject::decl(),
        ErrorCode::decl(),
        ErrorResponse::decl(),
    ];

    let mut content = String::from(
        "// This file was generated by `cargo run --bin generate-types`. Do not edit it manually.\n\n",
    );
    for decl in decls {
        content.push_str("export ");
        content.push_str(&decl);
        content.push_str("\n\n");
    }
    content
}

fn main() -> std::io::Result<()> {
    let content = generate_types_content();
    match env::args().nth(1) {
        Some(path) => {
            fs::write(&path, content)?;
            println!("Wrote TypeScript types to {path}");
        }
        None => print!("{content}"),
    }
    Ok(())
}
