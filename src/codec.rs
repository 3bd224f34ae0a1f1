//! 虚拟路径编解码
//!
//! 查询根路径为 `/` + 百分号编码的查询词，结果条目为根路径 + `/` + 十进制序号。
//! 解码顺序：末段纯数字 (序号) 或占位段、旧版 `?` 形式、无分隔符的单段、其余视为新查询。

use std::borrow::Cow;

use crate::config::PLACEHOLDER;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualAddress {
    Placeholder,
    QueryRoot(String),
    /// 相对于当前查询的结果序号
    IndexedChild(usize),
}

impl VirtualAddress {
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::QueryRoot(q) => Some(q),
            _ => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::IndexedChild(i) => Some(*i),
            _ => None,
        }
    }
}

pub struct PathCodec;

impl PathCodec {
    /// 纯数字查询的首字符强制转义，保证编码结果的末段不会被当作序号
    pub fn encode_query(query: &str) -> String {
        if !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit()) {
            let (first, rest) = query.split_at(1);
            return format!("/%{:02X}{}", first.as_bytes()[0], rest);
        }
        format!("/{}", urlencoding::encode(query))
    }

    pub fn encode_child(query: &str, index: usize) -> String {
        format!("{}/{}", Self::encode_query(query), index)
    }

    /// 列表中子条目的路径段
    pub fn child_segment(index: usize) -> String {
        index.to_string()
    }

    pub fn decode(path: &str) -> VirtualAddress {
        if path.contains('/') {
            let mut segments = path.split('/').filter(|s| !s.is_empty());
            let last = segments.next_back();
            let has_parent = segments.next().is_some();

            if let Some(last) = last {
                if last.bytes().all(|b| b.is_ascii_digit()) {
                    // 超出 usize 的序号必然越界，饱和处理
                    let index = last.parse().unwrap_or(usize::MAX);
                    return VirtualAddress::IndexedChild(index);
                }
                if last == PLACEHOLDER && has_parent {
                    return VirtualAddress::Placeholder;
                }
            }
        }

        // 旧版格式: base?raw query，查询词未编码
        if let Some((_, raw)) = path.split_once('?') {
            return VirtualAddress::QueryRoot(raw.to_string());
        }

        if !path.contains('/') {
            if path == PLACEHOLDER {
                return VirtualAddress::Placeholder;
            }
            return VirtualAddress::QueryRoot(percent_decode(path).into_owned());
        }

        let remainder = path.strip_prefix('/').unwrap_or(path).trim_end_matches('/');
        VirtualAddress::QueryRoot(percent_decode(remainder).into_owned())
    }

    /// 序号路径所属的查询根路径 (去掉末尾序号段)；其他地址返回 None
    pub fn query_root(path: &str) -> Option<&str> {
        Self::decode(path).index()?;
        path.trim_end_matches('/')
            .rsplit_once('/')
            .map(|(root, _)| root)
    }
}

fn percent_decode(s: &str) -> Cow<'_, str> {
    urlencoding::decode(s).unwrap_or(Cow::Borrowed(s))
}
