use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ViewConfig;
use crate::geometry::Point;
use crate::interaction::{
    ClickAction, InteractionController, InteractionError, click_action,
    drag::DragOutcome,
    menu::{MenuAction, MenuContext, OpenMenu},
};
use crate::layout::engine::{LayoutError, LayoutParams, TreeLayout, layout};
use crate::render::scene::{Scene, build_scene};
use crate::tree::{
    document::TreeNode,
    error::TreeError,
    hierarchy::Hierarchy,
    ids::NodeIndex,
    path::NodePath,
};
use crate::visibility::{
    filters::{FilterError, FilterSettings},
    state::{ExpansionChange, FilterState, Visibility},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("no tree is loaded")]
    NoTree,
    #[error("no context menu is open")]
    NoMenu,
    #[error("{0}")]
    Config(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Interaction(#[from] InteractionError),
}

/// Shown in place of the tree when a render pass fails.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPanel {
    pub message: String,
    /// Label of the action that calls `TreeView::reset_view`.
    pub reset_label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Scene(Scene),
    Error(ErrorPanel),
}

/// What a click or a menu action changed.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    Expansion(ExpansionChange),
    /// Whether the override is now active.
    Override(bool),
    PositionsReset(usize),
    Inspect(NodePath),
    Unchanged,
}

/// One active tree view and everything it owns: the document, its hierarchy,
/// the filter state and the interaction controller.
#[derive(Debug, Clone)]
pub struct TreeView {
    config: ViewConfig,
    document: Option<TreeNode>,
    hierarchy: Option<Hierarchy>,
    filters: FilterState,
    interaction: InteractionController,
}

impl TreeView {
    /// Create an empty view. The config is validated the same way the YAML loaders do.
    pub fn new(config: ViewConfig) -> Result<Self, ViewError> {
        config
            .validate()
            .map_err(|err| ViewError::Config(err.to_string()))?;
        let interaction = InteractionController::new(&config.interaction);
        Ok(TreeView {
            config,
            document: None,
            hierarchy: None,
            filters: FilterState::new(),
            interaction,
        })
    }

    /// Show a freshly uploaded tree. Filters, positions and the viewport start over.
    pub fn load(&mut self, tree: TreeNode) -> Result<(), ViewError> {
        let hierarchy = Hierarchy::build(&tree, &self.config.identity)?;
        self.filters = FilterState::new();
        self.interaction = InteractionController::new(&self.config.interaction);
        info!(nodes = hierarchy.len(), "tree loaded");
        self.document = Some(tree);
        self.hierarchy = Some(hierarchy);
        Ok(())
    }

    /// Swap in new data for the same session, such as the next growth step.
    /// Session state is kept and the filtered set is recomputed.
    pub fn refresh(&mut self, tree: TreeNode) -> Result<(), ViewError> {
        let hierarchy = Hierarchy::build(&tree, &self.config.identity)?;
        self.filters.recompute_filtered(&hierarchy);
        self.interaction.drag_cancel();
        self.interaction.menu_mut().close();
        debug!(nodes = hierarchy.len(), "tree refreshed");
        self.document = Some(tree);
        self.hierarchy = Some(hierarchy);
        Ok(())
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&TreeNode> {
        self.document.as_ref()
    }

    pub fn hierarchy(&self) -> Result<&Hierarchy, ViewError> {
        self.hierarchy.as_ref().ok_or(ViewError::NoTree)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Mutable access for editing the draft.
    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut InteractionController {
        &mut self.interaction
    }

    pub fn visibility(&self) -> Result<Visibility, ViewError> {
        Ok(self.filters.evaluate(self.hierarchy()?))
    }

    pub fn should_show_node(&self, index: NodeIndex) -> Result<bool, ViewError> {
        Ok(self.filters.should_show_node(index, self.hierarchy()?)?)
    }

    /// Lay out the visible nodes without touching interaction state.
    pub fn layout(&self) -> Result<TreeLayout, ViewError> {
        let hierarchy = self.hierarchy()?;
        let visibility = self.filters.evaluate(hierarchy);
        let params = LayoutParams::from_viewport(&self.config.viewport);
        Ok(layout(
            hierarchy,
            visibility.visible_nodes(),
            params,
            self.interaction.positions(),
        )?)
    }

    /// Run one full render pass: visibility, layout, viewport and projection.
    pub fn render(&mut self) -> Result<Scene, ViewError> {
        let hierarchy = self.hierarchy.as_ref().ok_or(ViewError::NoTree)?;
        let visibility = self.filters.evaluate(hierarchy);
        let params = LayoutParams::from_viewport(&self.config.viewport);
        let tree_layout = layout(
            hierarchy,
            visibility.visible_nodes(),
            params,
            self.interaction.positions(),
        )?;
        self.interaction.sync_layout(&tree_layout);
        self.interaction
            .viewport_mut()
            .establish(visibility.visible_count(), &self.config.viewport);
        Ok(build_scene(
            hierarchy,
            &visibility,
            &tree_layout,
            &self.interaction,
            &self.config.viewport,
        ))
    }

    /// `render`, with failures turned into an error panel instead of propagating.
    pub fn render_or_panel(&mut self) -> RenderOutcome {
        match self.render() {
            Ok(scene) => RenderOutcome::Scene(scene),
            Err(err) => {
                warn!(error = %err, "render failed");
                RenderOutcome::Error(ErrorPanel {
                    message: err.to_string(),
                    reset_label: "Reset view",
                })
            }
        }
    }

    /// Recovery action offered by the error panel: clear filters, hides,
    /// overrides, custom positions, the menu and the user's viewport.
    pub fn reset_view(&mut self) {
        self.filters.reset_filters();
        self.interaction.drag_cancel();
        self.interaction.positions_mut().reset_all();
        self.interaction.viewport_mut().reset();
        self.interaction.menu_mut().close();
        info!("view reset");
    }

    pub fn apply_filters(&mut self, settings: FilterSettings) -> Result<(), ViewError> {
        let hierarchy = self.hierarchy.as_ref().ok_or(ViewError::NoTree)?;
        self.filters.apply_filters(settings, hierarchy)?;
        Ok(())
    }

    pub fn apply_draft(&mut self) -> Result<(), ViewError> {
        let hierarchy = self.hierarchy.as_ref().ok_or(ViewError::NoTree)?;
        self.filters.apply_draft(hierarchy)?;
        Ok(())
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset_filters();
    }

    pub fn toggle_node_expansion(&mut self, index: NodeIndex) -> Result<ExpansionChange, ViewError> {
        let hierarchy = self.hierarchy.as_ref().ok_or(ViewError::NoTree)?;
        Ok(self.filters.toggle_node_expansion(index, hierarchy)?)
    }

    pub fn toggle_filter_override(&mut self, index: NodeIndex) -> Result<bool, ViewError> {
        let hierarchy = self.hierarchy.as_ref().ok_or(ViewError::NoTree)?;
        Ok(self.filters.toggle_filter_override(index, hierarchy)?)
    }

    /// Forget custom positions for `index` and its whole branch.
    pub fn reset_node_position(&mut self, index: NodeIndex) -> Result<usize, ViewError> {
        let hierarchy = self.hierarchy.as_ref().ok_or(ViewError::NoTree)?;
        hierarchy.node(index)?;
        Ok(self.interaction.positions_mut().reset_node(index, hierarchy))
    }

    pub fn reset_all_positions(&mut self) {
        self.interaction.positions_mut().reset_all();
    }

    /// Resolve a deep-link path such as `"0-2-1"`.
    pub fn node_at_path(&self, path: &str) -> Result<NodeIndex, ViewError> {
        let path: NodePath = path.parse()?;
        Ok(self.hierarchy()?.resolve_path(&path)?)
    }

    /// Apply click semantics to `index`.
    pub fn click(&mut self, index: NodeIndex) -> Result<ViewChange, ViewError> {
        let hierarchy = self.hierarchy.as_ref().ok_or(ViewError::NoTree)?;
        let node = hierarchy.node(index)?;
        let flags = self.filters.evaluate(hierarchy).flags(index);
        let action = click_action(
            flags,
            self.filters.is_hidden(node.key()),
            self.filters.is_filtered(node.key()),
        );
        match action {
            Some(ClickAction::ToggleExpansion) => Ok(ViewChange::Expansion(
                self.filters.toggle_node_expansion(index, hierarchy)?,
            )),
            Some(ClickAction::ToggleFilterOverride) => Ok(ViewChange::Override(
                self.filters.toggle_filter_override(index, hierarchy)?,
            )),
            None => Ok(ViewChange::Unchanged),
        }
    }

    pub fn drag_start(&mut self, index: NodeIndex) -> Result<(), ViewError> {
        let hierarchy = self.hierarchy.as_ref().ok_or(ViewError::NoTree)?;
        self.interaction.drag_start(index, hierarchy)?;
        Ok(())
    }

    pub fn drag_move(&mut self, delta: Point) -> bool {
        self.interaction.drag_move(delta)
    }

    /// Finish a drag. A gesture that resolves as a click applies click semantics.
    pub fn drag_end(&mut self) -> Result<(DragOutcome, ViewChange), ViewError> {
        let hierarchy = self.hierarchy.as_ref().ok_or(ViewError::NoTree)?;
        let outcome = self.interaction.drag_end(hierarchy);
        let change = match outcome {
            DragOutcome::Click { node } => self.click(node)?,
            _ => ViewChange::Unchanged,
        };
        Ok((outcome, change))
    }

    /// Open the context menu for `index` at screen point `at`.
    pub fn open_context_menu(&mut self, index: NodeIndex, at: Point) -> Result<&OpenMenu, ViewError> {
        let hierarchy = self.hierarchy.as_ref().ok_or(ViewError::NoTree)?;
        let node = hierarchy.node(index)?;
        let context = MenuContext {
            flags: self.filters.evaluate(hierarchy).flags(index),
            filter_relevant: self.filters.is_filtered(node.key())
                || self.filters.has_override(node.key()),
            has_custom_position: self.interaction.positions().contains(node.key()),
        };
        let menu = self.interaction.menu_mut();
        menu.open(index, node.key().clone(), at, context);
        menu.current().ok_or(ViewError::NoMenu)
    }

    /// Run `action` on the node the open menu belongs to, then close the menu.
    pub fn run_menu_action(&mut self, action: MenuAction) -> Result<ViewChange, ViewError> {
        let index = self
            .interaction
            .menu()
            .current()
            .map(|menu| menu.node)
            .ok_or(ViewError::NoMenu)?;
        self.interaction.menu_mut().close();
        match action {
            MenuAction::ToggleChildren => {
                Ok(ViewChange::Expansion(self.toggle_node_expansion(index)?))
            }
            MenuAction::ToggleFilterOverride => {
                Ok(ViewChange::Override(self.toggle_filter_override(index)?))
            }
            MenuAction::ResetPosition => {
                Ok(ViewChange::PositionsReset(self.reset_node_position(index)?))
            }
            MenuAction::Inspect => Ok(ViewChange::Inspect(self.hierarchy()?.path_of(index)?)),
        }
    }
}
