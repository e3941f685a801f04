use flow_forward::render::Render;

#[test]
fn nothing_to_render() {
    let render = Render::default();
    assert!(render.is_empty());
    assert!(render.flatten().is_empty());
}

#[test]
fn nested_empty_renders_are_empty() {
    let render = Render::Composed(vec![
        Render::None,
        Render::Defaults(Vec::new()),
        Render::Composed(vec![Render::None]),
    ]);
    assert!(render.is_empty());
    assert!(render.flatten().is_empty());
}
