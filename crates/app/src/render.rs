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

//! Plain-text rendering of a [`Presentation`].

use std::fmt::Write;

use watchlater_core::{Body, CardModel, Presentation, TableRow, view::TABLE_COLUMNS};

const EMPTY: &str = "No playlists yet";

pub fn presentation(p: &Presentation) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} ({})", p.title, p.scope);
    if p.show_sort {
        let _ = write!(out, " | sort: {}", p.sort.label());
    }
    out.push('\n');

    if p.body.is_empty() {
        out.push_str(EMPTY);
        out.push('\n');
        return out;
    }
    match &p.body {
        Body::Cards(cards) => cards.iter().for_each(|card| render_card(&mut out, card)),
        Body::Table(rows) => render_table(&mut out, rows),
    }
    out
}

fn render_card(out: &mut String, card: &CardModel) {
    let _ = writeln!(out, "[{}] {}  #{}", card.avatar, card.app, card.id);
    let _ = writeln!(out, "    {}", card.content);
    let _ = writeln!(out, "    {}", card.caption);
    let _ = writeln!(out, "    {}", card.sauce);
}

fn render_table(out: &mut String, rows: &[TableRow]) {
    let ids: Vec<String> = rows.iter().map(|r| r.id.to_string()).collect();

    let mut widths = [0usize; TABLE_COLUMNS.len() + 1];
    widths[0] = "Id".len();
    for (i, column) in TABLE_COLUMNS.iter().enumerate() {
        widths[i + 1] = column.chars().count();
    }
    for (id, row) in ids.iter().zip(rows) {
        widths[0] = widths[0].max(id.chars().count());
        for (i, cell) in row.cells().iter().enumerate() {
            widths[i + 1] = widths[i + 1].max(cell.chars().count());
        }
    }

    let header = std::iter::once("Id").chain(TABLE_COLUMNS.iter().copied());
    write_line(out, header, &widths);
    for (id, row) in ids.iter().zip(rows) {
        let cells = std::iter::once(id.as_str()).chain(row.cells());
        write_line(out, cells, &widths);
    }
}

fn write_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use watchlater_core::{DataScope, EntryId, PlaylistEntry, SortOption, ViewMode};

    use super::*;

    fn entries() -> Vec<PlaylistEntry> {
        vec![
            PlaylistEntry {
                id:      EntryId(12),
                content: "Keynote".into(),
                sauce:   "https://youtu.be/k".into(),
                app:     "youtube".into(),
                date:    "2024-03-01".into(),
                time:    "09:30".into(),
            },
            PlaylistEntry {
                id:      EntryId(3),
                content: "Jam".into(),
                sauce:   "https://vimeo.com/3".into(),
                app:     "vimeo".into(),
                date:    "2024-02-01".into(),
                time:    "20:00".into(),
            },
        ]
    }

    #[test]
    fn table_is_aligned() {
        let p = Presentation::compose(
            ViewMode::Playlists,
            DataScope::All,
            SortOption::DateDesc,
            &entries(),
        );
        let text = presentation(&p);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Playlists (all)");
        assert_eq!(
            lines[1],
            "Id  Content  App      Source               Date        Time"
        );
        assert_eq!(
            lines[2],
            "12  Keynote  youtube  https://youtu.be/k   2024-03-01  09:30"
        );
        assert_eq!(
            lines[3],
            "3   Jam      vimeo    https://vimeo.com/3  2024-02-01  20:00"
        );
    }

    #[test]
    fn cards_show_sort_and_caption() {
        let p = Presentation::compose(
            ViewMode::Playlists,
            DataScope::Owned,
            SortOption::ContentAsc,
            &entries()[..1],
        );
        let text = presentation(&p);
        assert_eq!(
            text,
            "Playlists (owned) | sort: Content (A-Z)\n[Y] youtube  #12\n    Keynote\n    \
             2024-03-01 at 09:30\n    https://youtu.be/k\n"
        );
    }

    #[test]
    fn empty_collection_has_placeholder() {
        let p = Presentation::compose(ViewMode::Feed, DataScope::Owned, SortOption::DateDesc, &[]);
        assert_eq!(presentation(&p), "Video Feed (owned)\nNo playlists yet\n");
    }
}
