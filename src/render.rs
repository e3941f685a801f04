//! Render composition.
//!
//! Flows describe what to draw in a pass with a [`Render`] value. The
//! renderer flattens it into the list of renderables it visits in order;
//! how each one is shaded is decided by its own material.

use crate::data_structures::renderable::Renderable;

/// The renderables submitted to one pass.
///
/// - `None` renders nothing
/// - `Default(&Renderable)` renders a single object
/// - `Defaults(Vec<&Renderable>)` renders a batch of objects in order
/// - `Composed(Vec<Render>)` renders each part in order
#[derive(Debug, Default)]
pub enum Render<'a> {
    #[default]
    None,
    Default(&'a Renderable),
    Defaults(Vec<&'a Renderable>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// All renderables in submission order.
    pub fn flatten(&self) -> Vec<&'a Renderable> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<&'a Renderable>) {
        match self {
            Render::None => (),
            Render::Default(renderable) => out.push(renderable),
            Render::Defaults(renderables) => out.extend(renderables.iter().copied()),
            Render::Composed(renders) => renders
                .iter()
                .for_each(|render| render.collect_into(out)),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Render::None => true,
            Render::Default(_) => false,
            Render::Defaults(renderables) => renderables.is_empty(),
            Render::Composed(renders) => renders.iter().all(Render::is_empty),
        }
    }
}

impl<'a> From<&'a Renderable> for Render<'a> {
    fn from(renderable: &'a Renderable) -> Self {
        Render::Default(renderable)
    }
}

impl<'a> From<&'a [Renderable]> for Render<'a> {
    fn from(renderables: &'a [Renderable]) -> Self {
        Render::Defaults(renderables.iter().collect())
    }
}

impl<'a> From<&'a Vec<Renderable>> for Render<'a> {
    fn from(renderables: &'a Vec<Renderable>) -> Self {
        renderables.as_slice().into()
    }
}

impl<'a> From<Vec<&'a Renderable>> for Render<'a> {
    fn from(renderables: Vec<&'a Renderable>) -> Self {
        Render::Defaults(renderables)
    }
}
