use serde_repr::{Deserialize_repr, Serialize_repr};

/// Resource-type codes understood by the remote store.
///
/// The store requires a type on every create; the code is inferred from the
/// file extension and defaults to markup for anything unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ResourceType {
    Markup = 1,
    Stylesheet = 2,
    Script = 3,
    Xml = 4,
    Png = 5,
    Jpeg = 6,
    Gif = 7,
    Xslt = 9,
    Icon = 10,
    Vector = 11,
    ResourceBundle = 12,
}

impl ResourceType {
    /// Infer the type from a resource name's extension
    pub fn from_name(name: &str) -> Self {
        match crate::config::extension_of(name).as_deref() {
            Some(".htm") | Some(".html") => ResourceType::Markup,
            Some(".css") => ResourceType::Stylesheet,
            Some(".js") => ResourceType::Script,
            Some(".xml") => ResourceType::Xml,
            Some(".png") => ResourceType::Png,
            Some(".jpg") | Some(".jpeg") => ResourceType::Jpeg,
            Some(".gif") => ResourceType::Gif,
            Some(".xsl") | Some(".xslt") => ResourceType::Xslt,
            Some(".ico") => ResourceType::Icon,
            Some(".svg") => ResourceType::Vector,
            Some(".resx") => ResourceType::ResourceBundle,
            _ => ResourceType::Markup,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Markup => "markup",
            ResourceType::Stylesheet => "stylesheet",
            ResourceType::Script => "script",
            ResourceType::Xml => "xml",
            ResourceType::Png => "png",
            ResourceType::Jpeg => "jpeg",
            ResourceType::Gif => "gif",
            ResourceType::Xslt => "xslt",
            ResourceType::Icon => "icon",
            ResourceType::Vector => "vector",
            ResourceType::ResourceBundle => "resource bundle",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
