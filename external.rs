/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Narrow contracts for collaborators this crate treats as external (§1,
//! §6): the resource fetcher and the graphics back-end. The style engine
//! contract lives in `style.rs` since `BoxStyle` is shared vocabulary with
//! the rest of the core.

use crate::geom::{PxRect, PxSize};
use crate::style::Color;

/// `fetchUrl` (§6). Implementations cache deterministically by URL; the
/// `data:` pseudo-scheme is never cached.
pub trait ResourceFetcher {
    fn fetch_url(&self, url: &str, mime_hint: Option<&str>) -> Option<FetchedResource>;
}

pub struct FetchedResource {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub text_encoding: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Transform2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
}

/// The graphics back-end contract (§6 "GraphicsContext"). The core calls
/// this during paint (`paint::paint`); it never inspects pixels itself.
pub trait GraphicsContext {
    fn set_fill_color(&mut self, color: Color);
    fn fill_rect(&mut self, rect: PxRect);
    fn fill_rounded_rect(&mut self, rect: PxRect, radii: [f32; 4]);
    fn stroke_rect(&mut self, rect: PxRect, width: f32, color: Color);

    fn push_transform(&mut self, transform: Transform2D);
    fn pop_transform(&mut self);

    fn push_clip(&mut self, rect: PxRect);
    fn push_clip_out(&mut self, rect: PxRect);
    fn pop_clip(&mut self);

    fn save(&mut self);
    fn restore(&mut self);

    fn push_group(&mut self, opacity: f32, blend_mode: BlendMode);
    fn pop_group(&mut self);

    /// Registers a named destination at a point, for internal links.
    fn set_named_destination(&mut self, name: &str, at: crate::geom::PxPoint);
    /// Registers a hyperlink over a rectangle, to a URL or local fragment.
    fn set_link(&mut self, rect: PxRect, target: &str);

    fn viewport_size(&self) -> PxSize;
}
