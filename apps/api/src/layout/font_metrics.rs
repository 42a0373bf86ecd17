//! Static font-metric tables for the capture layout.
//!
//! Widths are in em units (relative to font size), taken from the Helvetica
//! regular and bold AFM advance widths. The rasterizer substitutes whatever
//! sans-serif face the host has, so measured lines may differ from drawn lines
//! by a few percent; the layout keeps a safety margin on every line for that.
//! Tables cover ASCII 0x20..=0x7E (95 printable characters). Index = (char as usize) - 32.

// ────────────────────────────────────────────────────────────────────────────
// Face selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Fraction of the available width a measured line may fill.
pub const WRAP_SAFETY: f32 = 0.96;

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// `widths[i]` = advance width of ASCII character `(i + 32)` at 1em.
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback for non-ASCII characters (bullets, accented letters, CJK).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of `s` in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of `s` in pixels at `font_size` px.
    pub fn measure_px(&self, s: &str, font_size: f32) -> f32 {
        self.measure_str(s) * font_size
    }

    /// Greedy word-wrap of `s` into lines no wider than `max_width_px`.
    ///
    /// A single word wider than the line is broken at character boundaries.
    /// Empty or whitespace-only input yields no lines.
    pub fn wrap(&self, s: &str, font_size: f32, max_width_px: f32) -> Vec<String> {
        let max_em = (max_width_px * WRAP_SAFETY / font_size).max(self.average_char_width);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in s.split_whitespace() {
            let word_w = self.measure_str(word);

            if word_w > max_em {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                let mut pieces = self.break_word(word, max_em);
                if let Some(last) = pieces.pop() {
                    lines.extend(pieces);
                    current_width = self.measure_str(&last);
                    current = last;
                }
                continue;
            }

            let space_w = if current.is_empty() { 0.0 } else { self.space_width };
            if !current.is_empty() && current_width + space_w + word_w > max_em {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += self.space_width;
            }
            current.push_str(word);
            current_width += word_w;
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn break_word(&self, word: &str, max_em: f32) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut width = 0.0_f32;
        for c in word.chars() {
            let w = self.measure_str(c.encode_utf8(&mut [0; 4]));
            if !piece.is_empty() && width + w > max_em {
                pieces.push(std::mem::take(&mut piece));
                width = 0.0;
            }
            piece.push(c);
            width += w;
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }
}

/// Returns the metric table for the given weight.
pub fn get_metrics(weight: FontWeight) -> &'static FontMetricTable {
    match weight {
        FontWeight::Regular => &REGULAR_TABLE,
        FontWeight::Bold => &BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables
// ────────────────────────────────────────────────────────────────────────────

static REGULAR_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0-9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.56,
    space_width: 0.278,
};

static BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0-9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.60,
    space_width: 0.278,
};
