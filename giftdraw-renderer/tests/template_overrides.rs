use chrono::Utc;
use giftdraw_core::{Category, CategoryName, EventName, Guest, Phone, Registry};
use giftdraw_renderer::{MessageKind, Renderer, TemplateContext, TemplateEngine};
use tempfile::TempDir;

fn make_ctx(name: &str, companions: u32) -> TemplateContext {
    let guest = Guest {
        name: name.to_string(),
        phone: Phone::parse("3001234567").expect("phone"),
        category: CategoryName::from("Alimentación"),
        companions,
        registered_at: Utc::now(),
    };
    let registry = Registry::new(
        vec![Category::new("Alimentación", 5), Category::new("Juguetes", 5)],
        vec![guest.clone()],
    );
    TemplateContext::from_registration(&EventName::from("shower"), &guest, &registry)
}

#[test]
fn user_template_override_wins() {
    let dir = TempDir::new().expect("tempdir");
    let share_dir = dir.path().join("share");
    std::fs::create_dir_all(&share_dir).expect("mkdir");
    std::fs::write(
        share_dir.join("message.tera"),
        "CUSTOM {{ guest.name }} -> {{ guest.category }}\n",
    )
    .expect("write custom template");

    let renderer = Renderer::with_overrides(dir.path()).expect("renderer");
    let msg = renderer.render(&make_ctx("Ana", 0), MessageKind::Share).expect("render");
    assert_eq!(msg.body, "CUSTOM Ana -> Alimentación");

    // untouched kinds keep the embedded template
    let msg = renderer
        .render(&make_ctx("Ana", 0), MessageKind::Notification)
        .expect("render");
    assert!(msg.body.contains("Estado de categorías"));
}

#[test]
fn missing_override_dir_uses_embedded_templates() {
    let dir = TempDir::new().expect("tempdir");
    let renderer = Renderer::with_overrides(&dir.path().join("absent")).expect("renderer");
    let msg = renderer.render(&make_ctx("Ana", 0), MessageKind::Share).expect("render");
    assert!(msg.body.starts_with("Hola Ana"));
}

#[test]
fn non_tera_files_are_ignored() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("README.md"), "{{ broken").expect("write");
    TemplateEngine::new(Some(dir.path())).expect("non-.tera files must be skipped");
}

#[test]
fn broken_override_reports_template_error() {
    let dir = TempDir::new().expect("tempdir");
    let share_dir = dir.path().join("share");
    std::fs::create_dir_all(&share_dir).expect("mkdir");
    std::fs::write(share_dir.join("message.tera"), "{% if %}").expect("write");

    let err = Renderer::with_overrides(dir.path()).err().expect("must fail");
    assert!(err.to_string().contains("template engine error"), "got: {err}");
}

#[test]
fn rendering_handles_many_string_shapes() {
    let renderer = Renderer::new().expect("renderer");
    for name in ["Ana", "José Ñúñez", "O'Brien", "李小龍", "Ana & Luis <3"] {
        for companions in [0, 3] {
            let ctx = make_ctx(name, companions);
            for kind in MessageKind::all() {
                let msg = renderer.render(&ctx, *kind).expect("render");
                assert!(msg.body.contains(name), "{kind:?} lost name {name:?}");
            }
        }
    }
}
