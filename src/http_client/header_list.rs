//! 保序、大小写不敏感的 header 容器
//!
//! `HashMap<String, String>` 无法保留插入顺序，而指纹伪装要求请求/响应的
//! header 顺序与浏览器行为一致（见伪头顺序、Header 顺序相关不变式）。
//! 这里用一个保留插入顺序的 `Vec<(String, String)>` 代替，查找按
//! RFC 7230 规定做大小写不敏感比较。

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedHeaders(Vec<(String, String)>);

impl OrderedHeaders {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// 按 key 覆盖已存在的条目（保留其原始位置），否则追加到末尾
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.0.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        if let Some(pos) = self.0.iter().position(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some(self.0.remove(pos).1)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PairRef<'_>> {
        self.0.iter().map(|(k, v)| (k, v))
    }
}

type PairRef<'a> = (&'a String, &'a String);

impl<'a> IntoIterator for &'a OrderedHeaders {
    type Item = PairRef<'a>;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (String, String)>, fn(&'a (String, String)) -> PairRef<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().map(|(k, v)| (k, v))
    }
}

impl FromIterator<(String, String)> for OrderedHeaders {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let mut headers = OrderedHeaders::new();
        headers.insert("Accept", "*/*");
        headers.insert("User-Agent", "test");
        headers.insert("Accept-Language", "en");

        let keys: Vec<&str> = headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Accept", "User-Agent", "Accept-Language"]);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = OrderedHeaders::new();
        headers.insert("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some(&"text/html".to_string()));
        assert_eq!(headers.get("CONTENT-TYPE"), Some(&"text/html".to_string()));
    }

    #[test]
    fn reinserting_overwrites_in_place() {
        let mut headers = OrderedHeaders::new();
        headers.insert("A", "1");
        headers.insert("B", "2");
        headers.insert("a", "3");

        let pairs: Vec<(&str, &str)> =
            headers.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2")]);
    }
}
