//! KML プレースマーク生成
//!
//! 鉱区1件分の集計結果を KML 2.2 文書にする。KMZ への格納はルートクレート側。

use crate::types::{HoleSummary, MineAreaResult};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// XML特殊文字のエスケープ
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// CDATA 内に `]]>` が現れた場合は分割する
fn cdata(value: &str) -> String {
    format!("<![CDATA[{}]]>", value.replace("]]>", "]]]]><![CDATA[>"))
}

/// プレースマークの説明カード（HTML）
///
/// 区間は開始深度順に1行ずつ並べ、元レポートへのリンクを付ける。
pub fn render_description(mine_area: &str, hole: &HoleSummary) -> String {
    let mut html = String::new();
    html.push_str(
        r#"<div style="width:300px;padding:8px;border-radius:8px;background:#fff;border:1px solid #ccc;font-family:Arial;">"#,
    );
    html.push('\n');
    html.push_str(&format!(
        "  <b>{}, Bore Hole {}, Gradation</b><br>\n  ",
        escape_xml(mine_area),
        escape_xml(&hole.hole_id)
    ));

    for interval in hole.sorted_intervals() {
        let link = if interval.source_link.is_empty() {
            "#"
        } else {
            interval.source_link.as_str()
        };
        html.push_str(&format!(
            "{}\u{2013}{} ft \u{2192} FM {:.2} <a href=\"{}\" target=\"_blank\">Report</a><br>",
            interval.start_depth,
            interval.end_depth,
            interval.fineness_value,
            escape_xml(link)
        ));
    }

    html.push_str("\n</div>");
    html
}

fn push_placemark(kml: &mut String, mine_area: &str, hole: &HoleSummary) {
    kml.push_str("    <Placemark>\n");
    kml.push_str(&format!(
        "      <name>{}</name>\n",
        escape_xml(&format!("{}, {}", mine_area, hole.hole_id))
    ));
    kml.push_str(&format!(
        "      <description>{}</description>\n",
        cdata(&render_description(mine_area, hole))
    ));

    kml.push_str("      <ExtendedData>\n");
    let fields = [
        ("mine_area", mine_area.to_string()),
        ("hole_id", hole.hole_id.clone()),
        ("num_intervals", hole.intervals.len().to_string()),
    ];
    for (name, value) in fields {
        kml.push_str(&format!(
            "        <Data name=\"{}\"><value>{}</value></Data>\n",
            name,
            escape_xml(&value)
        ));
    }
    kml.push_str("      </ExtendedData>\n");

    // KML は経度, 緯度の順
    kml.push_str(&format!(
        "      <Point><coordinates>{},{},0</coordinates></Point>\n",
        hole.representative_longitude, hole.representative_latitude
    ));
    kml.push_str("    </Placemark>\n");
}

/// 鉱区の KML 文書（除外された孔は含めない）
pub fn render_kml(result: &MineAreaResult) -> String {
    let mut kml = String::new();
    kml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    kml.push('\n');
    kml.push_str(&format!("<kml xmlns=\"{}\">\n", KML_NAMESPACE));
    kml.push_str("  <Document>\n");
    kml.push_str(&format!("    <name>{}</name>\n", escape_xml(&result.mine_area)));

    for hole in &result.holes {
        push_placemark(&mut kml, &result.mine_area, hole);
    }

    kml.push_str("  </Document>\n");
    kml.push_str("</kml>\n");
    kml
}
