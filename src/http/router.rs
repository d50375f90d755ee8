//! Regex based route table. Routes are tested in the order they were added.
use regex::Regex;

type ParamsConverter<R> = Box<Fn(Vec<&str>) -> Option<R> + Send + Sync>;

pub struct RouteParser<R> {
    regex_and_converters: Vec<(Regex, ParamsConverter<R>)>,
}

impl<R> Default for RouteParser<R> {
    fn default() -> Self {
        Self {
            regex_and_converters: Vec::new(),
        }
    }
}

impl<R> RouteParser<R> {
    /// Adds a route without params
    pub fn add_route<F>(&mut self, regex_pattern: &str, f: F)
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        self.add_route_with_params(regex_pattern, move |_| Some(f()));
    }

    /// Adds a route whose capture groups are handed to `converter`
    pub fn add_route_with_params<F>(&mut self, regex_pattern: &str, converter: F)
    where
        F: Fn(Vec<&str>) -> Option<R> + Send + Sync + 'static,
    {
        let regex = Regex::new(regex_pattern).unwrap_or_else(|e| panic!("Invalid route pattern {}: {}", regex_pattern, e));
        self.regex_and_converters.push((regex, Box::new(converter)));
    }

    /// Returns the first route matching `path`
    pub fn test(&self, path: &str) -> Option<R> {
        for &(ref regex, ref converter) in &self.regex_and_converters {
            if let Some(captures) = regex.captures(path) {
                let params = captures.iter().skip(1).filter_map(|m| m.map(|m| m.as_str())).collect::<Vec<&str>>();
                if let Some(route) = converter(params) {
                    return Some(route);
                }
            }
        }
        None
    }
}
