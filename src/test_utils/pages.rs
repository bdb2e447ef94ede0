//! Management page fixtures shaped like the modem's firmware output.

/// Builds a `DocsisStatus.asp` body.
#[derive(Debug)]
pub struct StatusPageBuilder {
    downstream: Vec<Vec<String>>,
    upstream: Vec<Vec<String>>,
    tables: bool,
}

impl StatusPageBuilder {
    pub fn new() -> Self {
        Self {
            downstream: Vec::new(),
            upstream: Vec::new(),
            tables: true,
        }
    }

    /// Two locked downstream channels and one upstream channel.
    pub fn default_channels() -> Self {
        Self::new()
            .with_downstream(&[
                "1", "Locked", "QAM256", "5", "603000000 Hz", "3.4 dBmV", "40.1 dB", "17", "2",
            ])
            .with_downstream(&[
                "2", "Locked", "QAM256", "6", "609000000 Hz", "3.1 dBmV", "39.8 dB", "4", "0",
            ])
            .with_upstream(&[
                "1", "Locked", "ATDMA", "3", "5120 Ksym/sec", "36500000 Hz", "44.3 dBmV",
            ])
    }

    pub fn with_downstream(mut self, cells: &[&str]) -> Self {
        self.downstream.push(cells.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_upstream(mut self, cells: &[&str]) -> Self {
        self.upstream.push(cells.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Renders a page with neither channel table, as served mid-reboot.
    pub fn without_tables(mut self) -> Self {
        self.tables = false;
        self
    }

    pub fn build(self) -> String {
        if !self.tables {
            return "<html><body><p>Please wait...</p></body></html>".to_string();
        }
        format!(
            r#"<html><head><title>NETGEAR Gateway</title></head><body>
<table id="dsTable" class="sortable">
<tbody>
<tr><td><strong>Channel</strong></td><td><strong>Lock Status</strong></td><td><strong>Modulation</strong></td><td><strong>Channel ID</strong></td><td><strong>Frequency</strong></td><td><strong>Power</strong></td><td><strong>SNR</strong></td><td><strong>Correctables</strong></td><td><strong>Uncorrectables</strong></td></tr>
{}
</tbody>
</table>
<table id="usTable" class="sortable">
<tbody>
<tr><td><strong>Channel</strong></td><td><strong>Lock Status</strong></td><td><strong>US Channel Type</strong></td><td><strong>Channel ID</strong></td><td><strong>Symbol Rate</strong></td><td><strong>Frequency</strong></td><td><strong>Power</strong></td></tr>
{}
</tbody>
</table>
</body></html>"#,
            render_rows(&self.downstream),
            render_rows(&self.upstream)
        )
    }
}

fn render_rows(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|cells| {
            let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
            format!("<tr>{}</tr>", tds)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds an `EventLog.asp` body with its embedded XML event table.
#[derive(Debug)]
pub struct EventPageBuilder {
    events: Vec<(String, String, String)>,
    table: bool,
}

impl EventPageBuilder {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            table: true,
        }
    }

    pub fn with_event(mut self, first_time: &str, level: &str, text: &str) -> Self {
        self.events
            .push((first_time.to_string(), level.to_string(), text.to_string()));
        self
    }

    pub fn without_table(mut self) -> Self {
        self.table = false;
        self
    }

    /// A page whose event table has mismatched closing tags.
    pub fn malformed() -> String {
        wrap_event_page(
            "<docsDevEventTable><tr><docsDevEvIndex>1</docsDevEvText></tr></docsDevEventTable>",
        )
    }

    pub fn build(self) -> String {
        if !self.table {
            return wrap_event_page("");
        }
        let rows: String = self
            .events
            .iter()
            .enumerate()
            .map(|(i, (first_time, level, text))| {
                format!(
                    "<tr>\n<docsDevEvIndex>{index}</docsDevEvIndex>\n<docsDevEvFirstTime>{first_time}</docsDevEvFirstTime>\n<docsDevEvLastTime>{first_time}</docsDevEvLastTime>\n<docsDevEvCounts>1</docsDevEvCounts>\n<docsDevEvLevel>{level}</docsDevEvLevel>\n<docsDevEvId>{id}</docsDevEvId>\n<docsDevEvText>{text}</docsDevEvText>\n</tr>\n",
                    index = i + 1,
                    id = 82000200 + i,
                )
            })
            .collect();
        wrap_event_page(&format!("<docsDevEventTable>\n{}</docsDevEventTable>", rows))
    }
}

fn wrap_event_page(island: &str) -> String {
    format!(
        r#"<html><head><script language="javascript">
var tagValueList = '0|';
</script></head><body>
<table id="EventLogTable"><tr><td>Time</td><td>Priority</td><td>Description</td></tr></table>
{}
</body></html>"#,
        island
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_page_contains_tables() {
        let page = StatusPageBuilder::default_channels().build();
        assert!(page.contains(r#"id="dsTable""#));
        assert!(page.contains(r#"id="usTable""#));
        assert!(page.contains("<td>603000000 Hz</td>"));
        assert!(!StatusPageBuilder::new().without_tables().build().contains("dsTable"));
    }

    #[test]
    fn test_event_page_contains_island() {
        let page = EventPageBuilder::new()
            .with_event("2024-03-01, 14:05:09", "Notice (6)", "Honoring MDD")
            .build();
        assert!(page.contains("<docsDevEventTable>"));
        assert!(page.contains("<docsDevEvFirstTime>2024-03-01, 14:05:09</docsDevEvFirstTime>"));
        assert!(!EventPageBuilder::new().without_table().build().contains("docsDevEventTable"));
    }
}
