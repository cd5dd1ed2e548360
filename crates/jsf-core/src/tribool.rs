/// Boolean with an explicit third state.
///
/// On the wire `True`/`False` are bool scalars and `Unknown` is the
/// absence of the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tribool {
    True,
    False,
    #[default]
    Unknown,
}

impl Tribool {
    pub fn is_unknown(self) -> bool {
        self == Tribool::Unknown
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Tribool::True => Some(true),
            Tribool::False => Some(false),
            Tribool::Unknown => None,
        }
    }
}

impl From<bool> for Tribool {
    fn from(b: bool) -> Self {
        if b { Tribool::True } else { Tribool::False }
    }
}

impl From<Option<bool>> for Tribool {
    fn from(b: Option<bool>) -> Self {
        b.map_or(Tribool::Unknown, Tribool::from)
    }
}

impl From<Tribool> for Option<bool> {
    fn from(t: Tribool) -> Self {
        t.as_bool()
    }
}
