use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Opaque client-facing identifier: base64 of `<TypeName>:<pk>`,
/// for example `UserType:2` or `PostType:64`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlobalId {
    pub type_name: String,
    pub pk: i32,
}

impl GlobalId {
    pub fn new(type_name: impl Into<String>, pk: i32) -> Self {
        Self {
            type_name: type_name.into(),
            pk,
        }
    }

    pub fn encode(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.type_name, self.pk))
    }

    /// Returns `None` unless the id decodes to exactly one type name and one key
    pub fn decode(global_id: &str) -> Option<Self> {
        let bytes = STANDARD.decode(global_id.trim()).ok()?;
        let raw = String::from_utf8(bytes).ok()?;
        let (type_name, pk) = raw.split_once(':')?;
        if type_name.is_empty() || pk.contains(':') {
            return None;
        }
        let pk = pk.parse().ok()?;
        Some(Self::new(type_name, pk))
    }
}

pub fn to_global_id(type_name: &str, pk: i32) -> String {
    GlobalId::new(type_name, pk).encode()
}
