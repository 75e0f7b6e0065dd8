//! The controller: owns the board and the reconciler, and routes every
//! mutation through the save path.

use tracing::debug;

use crate::board::{decode_import, encode_export, Board, RecordPatch};
use crate::entity::{random_color, seed, Record};
use crate::error::{NotizError, Result};
use crate::remote::FinalizeReport;
use crate::sync::{Policy, Reconciler, Source};

pub const NEW_BLOCK_X: f64 = 120.0;
pub const NEW_BLOCK_Y: f64 = 120.0;
pub const NEW_BLOCK_TITLE: &str = "Neuer Block";

pub struct App {
    board: Board,
    sync: Reconciler,
    source: Source,
    saves: usize,
}

impl App {
    /// Load the board through `sync`. The app only exists once the board is ready.
    pub async fn start(mut sync: Reconciler) -> Self {
        let loaded = sync.load().await;
        let mut board = Board::new(loaded.records);
        board.select_first();
        Self {
            board,
            sync,
            source: loaded.source,
            saves: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn records(&self) -> &[Record] {
        self.board.records()
    }

    /// Where the startup board came from.
    pub fn source(&self) -> Source {
        self.source
    }

    pub fn policy(&self) -> Policy {
        self.sync.policy()
    }

    /// Number of saves triggered since start.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    fn persist(&mut self) {
        self.saves += 1;
        self.sync.save(self.board.records());
    }

    /// Add a default block at the standard spot with a random color.
    pub fn add_block(&mut self) -> String {
        self.add_record(Record::new(
            NEW_BLOCK_X,
            NEW_BLOCK_Y,
            NEW_BLOCK_TITLE,
            "",
            random_color(),
        ))
    }

    pub fn add_record(&mut self, record: Record) -> String {
        let id = self.board.add(record);
        self.persist();
        id
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.board.select(id);
    }

    /// A click on empty canvas closes the edit panel.
    pub fn click_canvas(&mut self) {
        self.board.clear_selection();
    }

    /// Apply a form edit to the selected block. Saves on every change.
    pub fn patch(&mut self, patch: RecordPatch) -> bool {
        if patch.is_empty() || !self.board.patch_selected(patch) {
            return false;
        }
        self.persist();
        true
    }

    pub fn delete(&mut self, id: &str) -> bool {
        if !self.board.delete(id) {
            return false;
        }
        self.persist();
        true
    }

    /// Replace the board with the seed set. Requires confirmation.
    pub fn reset(&mut self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(NotizError::UserAborted);
        }
        self.board.replace_all(seed());
        self.persist();
        Ok(())
    }

    /// Replace the board with an imported backup. On error nothing changes.
    pub fn import_text(&mut self, text: &str) -> Result<usize> {
        if !self.sync.allows_file_transfer() {
            return Err(NotizError::TransferDisabled);
        }
        let records = decode_import(text)?;
        let count = records.len();
        self.board.replace_all(records);
        self.persist();
        debug!(blocks = count, "backup imported");
        Ok(count)
    }

    pub fn export(&self) -> Result<String> {
        if !self.sync.allows_file_transfer() {
            return Err(NotizError::TransferDisabled);
        }
        encode_export(self.board.records())
    }

    pub fn pointer_down(&mut self, id: &str, px: f64, py: f64) -> bool {
        self.board.pointer_down(id, px, py)
    }

    /// Moves re-render only; nothing is saved until the drag ends.
    pub fn pointer_move(&mut self, px: f64, py: f64) -> bool {
        self.board.pointer_move(px, py)
    }

    pub fn pointer_up(&mut self) -> bool {
        if !self.board.pointer_up() {
            return false;
        }
        self.persist();
        true
    }

    /// Drive the debounced remote save.
    pub async fn tick(&mut self) -> bool {
        self.sync.tick().await
    }

    /// Sleep until the debounced remote save is due and send it.
    ///
    /// A long-running owner awaits this between input events; dropping the
    /// future when the next event arrives is safe, the following mutation
    /// reschedules the save.
    pub async fn wait_due(&mut self) -> bool {
        self.sync.wait_due().await
    }

    /// End the session, handing the latest board to the remote side.
    pub async fn close(mut self) -> Option<FinalizeReport> {
        self.sync.finalize(self.board.records()).await
    }
}
