use std::collections::HashMap;

/// Complete configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigDocument {
    pub properties: Properties,
    pub events: Option<Events>,
    pub http: Option<Http>,
}

/// `events { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Events {
    pub comment: String,
    pub properties: Properties,
}

/// `http { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Http {
    pub comment: String,
    pub properties: Properties,
    pub servers: Vec<Server>,
    pub upstreams: Vec<Upstream>,
}

/// `upstream NAME { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Upstream {
    pub comment: String,
    pub name: String,
    pub properties: Properties,
}

/// `server { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Server {
    pub comment: String,
    pub properties: Properties,
    pub locations: Vec<Location>,
    pub conditions: Vec<Condition>,
}

/// `location PATH { ... }` block. `path` holds every argument, joined by spaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub comment: String,
    pub path: String,
    pub properties: Properties,
    pub conditions: Vec<Condition>,
}

/// `if (CONDITION) { ... }` block. Only simple properties are allowed inside.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    pub comment: String,
    pub condition: String,
    pub properties: Properties,
}

/// A `name value...;` directive with its attached comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
    pub comment: String,
}

impl Property {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            comment: String::new(),
        }
    }

    /// Attach a comment to this property.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Whether the comment has anything worth printing.
    #[must_use]
    pub fn has_comment(&self) -> bool {
        self.comment.split_whitespace().next().is_some()
    }
}

/// Properties of one block in source order, with a by-name lookup.
///
/// Repeated names are all kept; [`Properties::get`] returns the last one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Properties {
    items: Vec<Property>,
    by_name: HashMap<String, usize>,
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, property: Property) {
        self.by_name
            .insert(property.name.clone(), self.items.len());
        self.items.push(property);
    }

    /// Last property registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.by_name.get(name).map(|&index| &self.items[index])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Replace the value of every property called `name`.
    ///
    /// Returns `false` if there was none. Not safe to call while other
    /// code is reading the list; callers serialize access themselves.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let mut found = false;
        for property in self.items.iter_mut().filter(|p| p.name == name) {
            property.value.clone_from(&value);
            found = true;
        }
        found
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Property] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Property> for Properties {
    fn from_iter<T: IntoIterator<Item = Property>>(iter: T) -> Self {
        let mut properties = Self::new();
        for property in iter {
            properties.push(property);
        }
        properties
    }
}

impl ConfigDocument {
    /// Create a new empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level property.
    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Set the `events` block.
    #[must_use]
    pub fn events(mut self, events: Events) -> Self {
        self.events = Some(events);
        self
    }

    /// Set the `http` block.
    #[must_use]
    pub fn http(mut self, http: Http) -> Self {
        self.http = Some(http);
        self
    }
}

impl Events {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }
}

impl Http {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    #[must_use]
    pub fn upstream(mut self, upstream: Upstream) -> Self {
        self.upstreams.push(upstream);
        self
    }
}

impl Upstream {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }
}

impl Server {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a `listen` property.
    #[must_use]
    pub fn listen(self, address: &str) -> Self {
        self.property(Property::new("listen", address))
    }

    /// Add a `server_name` property.
    #[must_use]
    pub fn server_name(self, names: &str) -> Self {
        self.property(Property::new("server_name", names))
    }
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

impl Condition {
    #[must_use]
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }
}
