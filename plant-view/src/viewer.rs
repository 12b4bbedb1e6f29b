//! Interactive plant viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Scene`] and implements
//! [`eframe::App`] to draw the plant and forward key/mouse input to it.

use eframe::App;
use glam::Vec2;
use plant_core::{
    config::{Recursion, Species},
    growth::GrowthOutcome,
    scene::{InputEvent, Scene, SceneOutcome},
    sprites::Renderer,
    types::AssetId,
};

/// Main application state for the interactive viewer.
///
/// ### Fields
/// - `scene` - The growing plant and its random source.
/// - `species` - Species being edited in the side panel; applied on demand.
/// - `preset` - Name of the preset last loaded into `species`.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
/// - `status` - One-line description of the last handled event.
pub struct Viewer {
    scene: Scene,
    species: Species,
    preset: &'static str,

    zoom: f32,
    pan: egui::Vec2,

    status: String,
}

const PRESETS: [&str; 3] = ["default", "sapling", "cherry_blossom"];

impl Viewer {
    pub fn new(species: Species) -> Self {
        Self::with_scene(Scene::new(species))
    }

    /// Wraps an existing scene; the side panel starts from its species.
    pub fn with_scene(scene: Scene) -> Self {
        Self {
            species: scene.species().clone(),
            scene,
            preset: "default",
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            status: String::from("Space: grow   Tab: clear   Click: delete branch"),
        }
    }

    /// Hands the edited species to the scene if it validates.
    fn apply_species(&mut self) {
        match self.species.validate() {
            Ok(()) => {
                self.scene.set_species(self.species.clone());
                self.status = String::from("species applied");
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    /// Forwards one input event to the scene and records the outcome.
    fn dispatch(&mut self, event: InputEvent) {
        match self.scene.handle(event) {
            Ok(outcome) => self.status = describe(&outcome),
            Err(e) => {
                tracing::error!("{e}");
                self.status = e.to_string();
            }
        }
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates already use screen orientation (y grows down), so
    /// this is a scale by `zoom` and an offset by `pan` from the top-left
    /// corner of `rect`.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        egui::pos2(
            rect.min.x + p.x * self.zoom + self.pan.x,
            rect.min.y + p.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        Vec2::new(
            (p.x - rect.min.x - self.pan.x) / self.zoom,
            (p.y - rect.min.y - self.pan.y) / self.zoom,
        )
    }

    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(1.0));
        });
    }

    fn labeled_drag_u32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut u32,
        range: std::ops::RangeInclusive<u32>,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(1.0));
        });
    }

    /// A cap is edited as a checkbox (limited or not) plus its value.
    fn labeled_cap(ui: &mut egui::Ui, label: &str, cap: &mut Option<usize>, fallback: usize) {
        ui.horizontal(|ui| {
            let mut limited = cap.is_some();
            if ui.checkbox(&mut limited, label).changed() {
                *cap = limited.then_some(fallback);
            }
            if let Some(value) = cap {
                ui.add(egui::DragValue::new(value).range(1..=10_000).speed(1.0));
            }
        });
    }

    /// Builds the top panel (grow/clear/reset, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("🌱 Grow").clicked() {
                    self.dispatch(InputEvent::Grow);
                }
                if ui.button("Clear").clicked() {
                    self.dispatch(InputEvent::Clear);
                }
                if ui.button("Reset").clicked() {
                    self.scene.reset();
                    self.status = String::from("new plant");
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.25..=4.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (last event, leaf and node counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let tree = self.scene.tree();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("depth = {}", tree.deepest_path()));
                    ui.label(format!("nodes = {}", tree.count_nodes()));
                    ui.label(format!("leaves = {}", tree.leaves().len()));
                });
            });
        });
    }

    /// Builds the right-hand species panel.
    fn ui_species_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("species_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Species");

                egui::ComboBox::from_label("Preset")
                    .selected_text(self.preset)
                    .show_ui(ui, |ui| {
                        for name in PRESETS {
                            if ui.selectable_label(self.preset == name, name).clicked() {
                                self.preset = name;
                                if let Some(species) = Species::preset(name) {
                                    self.species = species;
                                }
                            }
                        }
                    });

                ui.separator();
                ui.label("Trunk");
                Self::labeled_drag_usize(ui, "trunk_height:", &mut self.species.trunk_height, 1..=50);
                Self::labeled_drag_u32(ui, "trunk_spread:", &mut self.species.trunk_spread, 1..=180);

                ui.separator();
                ui.label("Canopy");
                Self::labeled_drag_u32(ui, "canopy_spread:", &mut self.species.canopy_spread, 1..=180);
                Self::labeled_drag_u32(ui, "sprout_chance:", &mut self.species.sprout_chance, 0..=99);
                Self::labeled_drag_u32(ui, "segment_length:", &mut self.species.segment_length, 1..=50);
                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.species.recursion, Recursion::NewShoots, "new shoots");
                    ui.radio_value(&mut self.species.recursion, Recursion::AllChildren, "all children");
                });

                ui.separator();
                ui.label("Flowers");
                Self::labeled_drag_usize(ui, "bloom_depth:", &mut self.species.bloom_depth, 1..=50);
                Self::labeled_drag_u32(ui, "flower_chance (1 in):", &mut self.species.flower_chance, 1..=100);

                ui.separator();
                ui.label("Size caps");
                Self::labeled_cap(ui, "leaf_cap", &mut self.species.leaf_cap, 50);
                Self::labeled_cap(ui, "node_cap", &mut self.species.node_cap, 250);

                ui.separator();
                if ui.button("Apply").clicked() {
                    self.apply_species();
                }
            });
    }

    /// Builds the central panel where the plant is drawn and clicked.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            if response.clicked()
                && let Some(pos) = response.interact_pointer_pos()
            {
                let world = self.screen_to_world(pos, rect);
                self.dispatch(InputEvent::SelectAndDelete(world));
            }

            // Segments first so sprites are drawn on top.
            let tree = self.scene.tree();
            for (_, node) in tree.iter() {
                if let Some(parent) = node.parent().and_then(|p| tree.get(p)) {
                    let a = self.world_to_screen(parent.pos(), rect);
                    let b = self.world_to_screen(node.pos(), rect);
                    painter.line_segment([a, b], egui::Stroke::new(2.0 * self.zoom, STEM_COLOR));
                }
            }

            let mut renderer = PainterRenderer {
                painter: &painter,
                viewer: self,
                rect,
            };
            self.scene.render(&mut renderer);
        });
    }

    /// Maps key presses to input events.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (grow, clear, quit) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::Tab),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if grow {
            self.dispatch(InputEvent::Grow);
        }
        if clear {
            self.dispatch(InputEvent::Clear);
        }
        if quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

const STEM_COLOR: egui::Color32 = egui::Color32::from_rgb(110, 80, 50);
const LEAF_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 170, 70);
const FLOWER_COLOR: egui::Color32 = egui::Color32::from_rgb(245, 170, 200);
const POT_COLOR: egui::Color32 = egui::Color32::from_rgb(170, 90, 60);

/// Draws sprites as coloured shapes on an egui painter.
struct PainterRenderer<'a> {
    painter: &'a egui::Painter,
    viewer: &'a Viewer,
    rect: egui::Rect,
}

impl Renderer for PainterRenderer<'_> {
    fn draw(&mut self, pos: Vec2, asset: AssetId) {
        let p = self.viewer.world_to_screen(pos, self.rect);
        let zoom = self.viewer.zoom;
        match asset {
            AssetId::Stem => {
                self.painter.circle_filled(p, 2.0 * zoom, STEM_COLOR);
            }
            AssetId::Leaf => {
                self.painter.circle_filled(p, 4.0 * zoom, LEAF_COLOR);
            }
            AssetId::Flower => {
                self.painter.circle_filled(p, 5.0 * zoom, FLOWER_COLOR);
            }
            AssetId::Pot => {
                let size = egui::vec2(60.0, 40.0) * zoom;
                let pot = egui::Rect::from_min_size(p - egui::vec2(size.x / 2.0, 0.0), size);
                self.painter.rect_filled(pot, 4.0 * zoom, POT_COLOR);
            }
        }
    }
}

/// Short status line for a handled event.
fn describe(outcome: &SceneOutcome) -> String {
    match outcome {
        SceneOutcome::Grown(report) => match report.outcome {
            GrowthOutcome::Grown => format!(
                "grew {} segments, {} flowers",
                report.new_nodes.len() - report.flowers_added,
                report.flowers_added
            ),
            GrowthOutcome::AtCapacity => String::from("plant has reached its maximum size"),
        },
        SceneOutcome::Cleared { removed } => format!("cleared {removed} nodes"),
        SceneOutcome::Deleted { removed, .. } => format!("deleted branch of {removed} nodes"),
        SceneOutcome::NothingSelected => String::from("nothing selected"),
    }
}

impl App for Viewer {
    /// eframe callback that handles input and builds all panels each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_species_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_core::sprites::DrawList;
    use rand::{SeedableRng, rngs::StdRng};

    fn seeded(species: Species) -> Viewer {
        Viewer::with_scene(Scene::with_rng(species, StdRng::seed_from_u64(3)))
    }

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = seeded(Species::default());
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        let eps = 1e-4;
        for p in [
            Vec2::new(0.0, 0.0),
            Vec2::new(400.0, 500.0),
            Vec2::new(-3.5, 8.25),
        ] {
            let back = viewer.screen_to_world(viewer.world_to_screen(p, rect), rect);
            assert!(
                (back - p).length() < eps,
                "roundtrip mismatch: p={:?}, back={:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn dispatch_grow_and_clear_update_scene() {
        let mut viewer = seeded(Species::default());

        viewer.dispatch(InputEvent::Grow);
        assert_eq!(viewer.scene.tree().count_nodes(), 2);
        assert!(viewer.status.starts_with("grew 1 segments"));

        viewer.dispatch(InputEvent::Clear);
        assert_eq!(viewer.scene.tree().count_nodes(), 1);
        assert_eq!(viewer.status, "cleared 1 nodes");
    }

    #[test]
    fn clicking_a_segment_deletes_it() {
        let mut viewer = seeded(Species::default());
        for _ in 0..3 {
            viewer.dispatch(InputEvent::Grow);
        }
        let tree = viewer.scene.tree();
        let tip = *tree.leaves().last().unwrap();
        let pos = tree.get(tip).unwrap().pos();

        viewer.dispatch(InputEvent::SelectAndDelete(pos));

        assert!(viewer.scene.tree().get(tip).is_none());
        assert_eq!(viewer.status, "deleted branch of 1 nodes");
    }

    #[test]
    fn scene_draws_through_renderer_seam() {
        let viewer = seeded(Species::default());
        let mut list = DrawList::default();

        viewer.scene.render(&mut list);

        // Root plus pot.
        assert_eq!(list.commands.len(), 2);
        assert_eq!(list.commands[1].1, AssetId::Pot);
    }

    #[test]
    fn apply_rejects_uncapped_species() {
        let mut viewer = seeded(Species::default());
        viewer.species.leaf_cap = None;
        viewer.species.node_cap = None;

        viewer.apply_species();

        assert_eq!(viewer.scene.species(), &Species::default());
        assert!(viewer.status.contains("leaf_cap"), "status: {}", viewer.status);

        viewer.species.node_cap = Some(100);
        viewer.apply_species();

        assert_eq!(viewer.scene.species().node_cap, Some(100));
        assert_eq!(viewer.status, "species applied");
    }
}
