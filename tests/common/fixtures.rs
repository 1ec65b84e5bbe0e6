//! Generation response fixtures.

use serde_json::{json, Value};

/// Thread ids used across fixtures
pub mod threads {
    pub const BLACK: &str = "310";
    pub const WHITE: &str = "B5200";
    pub const RED: &str = "666";
}

fn cell(id: &str, name: &str, rgb: [u8; 3]) -> Value {
    json!({ "dmc": id, "name": name, "rgb": rgb })
}

/// Two rows by three columns, alternating black and white, plus one red stitch
pub fn two_by_three() -> Value {
    let black = cell(threads::BLACK, "Black", [0, 0, 0]);
    let white = cell(threads::WHITE, "Snow White", [255, 255, 255]);
    let red = cell(threads::RED, "Bright Red", [227, 29, 66]);

    json!({
        "success": true,
        "pattern_data": {
            "pattern": [
                [black, white, black],
                [white, black, red],
            ],
            "colors_used": [
                { "dmc": threads::BLACK, "name": "Black", "rgb": [0, 0, 0] },
                { "dmc": threads::WHITE, "name": "Snow White", "rgb": [255, 255, 255] },
                { "dmc": threads::RED, "name": "Bright Red", "rgb": [227, 29, 66] },
            ],
            "symbol_map": { "310": "1", "B5200": "2", "666": "3" },
            "width": 3,
            "height": 2,
            "mesh_count": 14
        },
        "original_image": "uploads/cat.png",
        "canvas_size": "3x2",
        "mesh_count": 14,
        "max_colors": 3
    })
}

/// Single solid-color row using numeric thread ids
pub fn numeric_ids(cols: usize) -> Value {
    let row: Vec<Value> = (0..cols)
        .map(|_| json!({ "dmc": 321, "name": "Red", "rgb": [199, 43, 59] }))
        .collect();
    json!({
        "success": true,
        "pattern_data": {
            "pattern": [row],
            "colors_used": [321]
        }
    })
}

/// Square grid shaped like a full-size server response, with symbols and
/// long thread names
pub fn square(size: usize) -> Value {
    let threads = [
        (310, "Black", [0, 0, 0]),
        (3865, "Winter White", [249, 247, 241]),
        (3371, "Black Brown", [30, 17, 8]),
        (3799, "Pewter Gray - Very Dark", [66, 66, 66]),
    ];
    let pattern: Vec<Value> = (0..size)
        .map(|row| {
            let cells: Vec<Value> = (0..size)
                .map(|col| {
                    let (id, name, rgb) = threads[(row + col) % threads.len()];
                    json!({ "dmc": id, "name": name, "rgb": rgb, "symbol": "1" })
                })
                .collect();
            Value::Array(cells)
        })
        .collect();
    let colors: Vec<Value> = threads.iter().map(|(id, _, _)| json!(id)).collect();

    json!({
        "success": true,
        "pattern_data": {
            "pattern": pattern,
            "colors_used": colors,
            "width": size,
            "height": size
        },
        "canvas_size": format!("{size}x{size}")
    })
}

/// Rows of different lengths
pub fn ragged() -> Value {
    let black = cell(threads::BLACK, "Black", [0, 0, 0]);
    json!({
        "success": true,
        "pattern_data": {
            "pattern": [[black.clone(), black.clone()], [black]],
            "colors_used": [{ "dmc": threads::BLACK, "name": "Black", "rgb": [0, 0, 0] }]
        }
    })
}

/// No rows at all
pub fn empty() -> Value {
    json!({
        "success": true,
        "pattern_data": { "pattern": [], "colors_used": [] }
    })
}

/// Server-side refusal with a message
pub fn rejected(message: &str) -> Value {
    json!({ "success": false, "error": message })
}
