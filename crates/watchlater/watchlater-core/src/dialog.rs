// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    err::Result,
    model::{DraftField, EntryDraft},
};

/// Create-entry dialog: whether it is open and the form being filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateDialog {
    open: bool,
    form: EntryDraft,
}

impl CreateDialog {
    pub fn is_open(&self) -> bool { self.open }

    pub fn form(&self) -> &EntryDraft { &self.form }

    /// Opens with an empty form.
    pub fn open(&mut self) {
        self.form = EntryDraft::default();
        self.open = true;
    }

    /// Closes and discards the form.
    pub fn close(&mut self) {
        self.open = false;
        self.form = EntryDraft::default();
    }

    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Validated copy of the form. The dialog itself is left as is so that a
    /// failed submission keeps what the user typed.
    pub fn submit(&self) -> Result<EntryDraft> {
        self.form.validate()?;
        Ok(self.form.clone())
    }
}
